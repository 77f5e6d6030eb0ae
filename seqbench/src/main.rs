fn main() -> anyhow::Result<()> {
    seqbench::run()
}
