use campus_ngin::{Config, flow::run, scenes::ClassroomFlow};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()
        .with_title("Classroom")
        .with_size(1280, 720);
    run(ClassroomFlow::new(), config)
}
