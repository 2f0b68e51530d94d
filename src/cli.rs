use argparse::{ArgumentParser, Collect, Store, StoreOption, StoreTrue};
use std::path::PathBuf;

pub struct CliArgs {
    pub inputs: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub sites: Option<PathBuf>,
    pub talkgroups: Option<PathBuf>,
    pub tz: Option<String>,
    pub log_level: String,
    pub no_summary: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            inputs: vec![],
            out_dir: PathBuf::from("."),
            sites: None,
            talkgroups: None,
            tz: None,
            log_level: "essential".into(),
            no_summary: false,
        }
    }
}

pub fn parse_cli() -> CliArgs {
    let mut args = CliArgs::default();
    {
        let mut ap = ArgumentParser::new();
        ap.set_description("CMSS diagnostic dumps -> channel/registration/affiliation CSV tables");
        ap.refer(&mut args.inputs)
            .add_argument("inputs", Collect, "Diagnostic .txt files or directories (one or more)");
        ap.refer(&mut args.out_dir)
            .add_option(&["--out-dir"], Store, "Directory for the output tables");
        ap.refer(&mut args.sites)
            .add_option(&["--sites"], StoreOption, "Site name table (CSV: id,label)");
        ap.refer(&mut args.talkgroups)
            .add_option(&["--talkgroups"], StoreOption, "Talkgroup label table (CSV: id,label)");
        ap.refer(&mut args.tz)
            .add_option(&["--tz"], StoreOption, "Timezone for hourly activity (IANA name)");
        ap.refer(&mut args.log_level)
            .add_option(&["--log"], Store, "Log level (essential|debug|trace|warn|error)");
        ap.refer(&mut args.no_summary)
            .add_option(&["--no-summary"], StoreTrue, "Skip summary.json");
        ap.parse_args_or_exit();
    }
    args
}
