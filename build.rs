//! Records the target triple this binary was built for, so the compiler
//! adapter resolves the same C toolchain `cc` would pick in a build script.

fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();
    println!("cargo:rustc-env=WHEELWRIGHT_HOST_TARGET={target}");
    println!("cargo:rerun-if-changed=build.rs");
}
