fn main() -> anyhow::Result<()> {
    voiceover_lib::run()
}
