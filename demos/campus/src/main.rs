use campus_ngin::{
    Config,
    flow::run,
    scenes::{CampusFlow, CampusStyle},
};

fn main() -> anyhow::Result<()> {
    // `--plain` draws the buildings without their numbers
    let style = if std::env::args().any(|arg| arg == "--plain") {
        CampusStyle::Plain
    } else {
        CampusStyle::Labelled
    };
    let config = Config::from_env().with_title("Campus");
    run(CampusFlow::new(style), config)
}
