#[derive(Clone, Debug, Default)]
pub struct Policy {
    /// Surface symlinks whose targets stay beneath the project root.
    /// Links are skipped entirely when false.
    pub allow_symlinks: bool,
}
