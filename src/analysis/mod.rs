/// Maximal end-component decomposition
pub mod ec;
/// Qualitative reachability operators
pub mod reach;
