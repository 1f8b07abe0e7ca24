fn main() -> anyhow::Result<()> {
    jsonservice::cli::run_cli()
}
