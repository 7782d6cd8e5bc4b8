/// The xtask binary delegates to nih_plug_xtask for the `bundle`
/// subcommand:
///
///   cargo xtask bundle universal-comb-filter --release
///
/// The bundles land in `target/bundled/` as `Universal Comb Filter.vst3`
/// and `Universal Comb Filter.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
