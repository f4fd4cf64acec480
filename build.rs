// Build script for csp-interop
//
// The header (include/csp_interop.h) is maintained manually: cbindgen 0.27
// does not recognize Rust 2024's #[unsafe(no_mangle)] attribute syntax, so
// it is not a build dependency.
//
// To regenerate types only, install the cbindgen CLI and run:
//   cbindgen --config cbindgen.toml --crate csp-interop --output include/csp_interop_types.h

fn main() {
    println!("cargo:rerun-if-changed=src/");
}
