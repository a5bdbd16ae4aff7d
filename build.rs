// Build script for dawn-native-interop
//
// The public header (include/dawn_native_interop.h) is maintained manually.
// Enabling the `header` feature regenerates the type declarations only:
//   cargo build --features header
// which writes include/dawn_native_interop_types.h.
//
// With the `link` feature the WebGPU library is linked directly. Its name
// defaults to `webgpu_dawn` and can be overridden with DNI_WEBGPU_LINK_NAME;
// DNI_WEBGPU_LINK_SEARCH adds a native search path.

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-env-changed=DNI_WEBGPU_LINK_NAME");
    println!("cargo:rerun-if-env-changed=DNI_WEBGPU_LINK_SEARCH");

    if std::env::var_os("CARGO_FEATURE_LINK").is_some() {
        if let Ok(dir) = std::env::var("DNI_WEBGPU_LINK_SEARCH") {
            println!("cargo:rustc-link-search=native={dir}");
        }
        let name =
            std::env::var("DNI_WEBGPU_LINK_NAME").unwrap_or_else(|_| "webgpu_dawn".to_string());
        println!("cargo:rustc-link-lib=dylib={name}");
    }

    #[cfg(feature = "header")]
    generate_types_header();
}

#[cfg(feature = "header")]
fn generate_types_header() {
    let crate_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let config = cbindgen::Config::from_file(format!("{crate_dir}/cbindgen.toml"))
        .expect("cbindgen.toml must be readable");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(format!("{crate_dir}/include/dawn_native_interop_types.h"));
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
