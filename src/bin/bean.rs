use beanview::{app, config::SceneConfig};

fn main() -> anyhow::Result<()> {
    app::run(SceneConfig::evolving_bean())
}
