fn main() -> anyhow::Result<()> {
    scene_fade::run(scene_fade::Config::default())
}
