pub mod acr_to_csm;
pub mod lpc_to_lsp;
pub mod lpc_to_parcor;
pub mod lsp_format;
pub mod lsp_to_lpc;
pub mod mglsp_to_spectrum;
pub mod mlsa;
pub mod parcor_to_lpc;
