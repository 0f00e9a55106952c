use campus_ngin::{Config, flow::run, scenes::CubeFlow};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().with_title("Cube");
    run(CubeFlow::new(), config)
}
