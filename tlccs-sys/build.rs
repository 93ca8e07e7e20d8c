use std::env;
use std::path::PathBuf;

/// Check the usual VXIpnp install locations for the TLCCS header.
#[allow(dead_code)]
fn find_driver_dir() -> Option<PathBuf> {
    let candidates = [
        "C:/Program Files/IVI Foundation/VISA/Win64",
        "C:/Program Files (x86)/IVI Foundation/VISA/WinNT",
        "/opt/thorlabs/tlccs",
    ];

    for path in &candidates {
        let p = PathBuf::from(path);
        if p.join("Include").join("TLCCS.h").exists() || p.join("include").join("TLCCS.h").exists()
        {
            return Some(p);
        }
    }
    None
}

#[allow(dead_code)]
fn include_dir(driver_dir: &std::path::Path) -> PathBuf {
    let upper = driver_dir.join("Include");
    if upper.exists() {
        upper
    } else {
        driver_dir.join("include")
    }
}

fn main() {
    // Only run bindgen and linking logic if the `tlccs-driver` feature is enabled.
    // This allows the crate to compile without the vendor driver installed.
    #[cfg(feature = "tlccs-driver")]
    {
        println!("cargo:rerun-if-env-changed=TLCCS_DRIVER_DIR");
        println!("cargo:rerun-if-env-changed=TLCCS_LIB_DIR");
        println!("cargo:rerun-if-changed=wrapper.h");

        let driver_dir = match env::var("TLCCS_DRIVER_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => match find_driver_dir() {
                Some(found) => {
                    println!(
                        "cargo:warning=TLCCS_DRIVER_DIR not set, auto-detected: {}",
                        found.display()
                    );
                    found
                }
                None => {
                    panic!(
                        "TLCCS_DRIVER_DIR environment variable must be set when the \
                         `tlccs-driver` feature is enabled. Point it at the VXIpnp \
                         directory containing Include/TLCCS.h."
                    );
                }
            },
        };

        let include_path = include_dir(&driver_dir);
        if !include_path.join("TLCCS.h").exists() {
            panic!(
                "TLCCS.h not found under {:?}; check your TLCCS driver installation",
                include_path
            );
        }

        // Allow TLCCS_LIB_DIR to override the default import-library path
        let lib_path = match env::var("TLCCS_LIB_DIR") {
            Ok(lib_dir) => PathBuf::from(lib_dir),
            Err(_) => driver_dir.join("Lib_x64").join("msc"),
        };
        if !lib_path.exists() {
            println!(
                "cargo:warning=TLCCS library path does not exist: {}",
                lib_path.display()
            );
            println!("cargo:warning=Linker will search LIBRARY_PATH and standard paths");
        }

        let bindings = bindgen::Builder::default()
            .header("wrapper.h")
            .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
            .clang_arg(format!("-I{}", include_path.display()))
            // The driver exports a flat C API prefixed `tlccs_`
            .allowlist_function("tlccs_.*")
            // VISA scalar typedefs used in the signatures
            .allowlist_type("Vi.*")
            .allowlist_var("TLCCS_.*")
            .allowlist_var("VI_.*")
            .default_enum_style(bindgen::EnumVariation::Rust {
                non_exhaustive: false,
            })
            .generate()
            .expect("Unable to generate TLCCS bindings");

        let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
        bindings
            .write_to_file(out_path.join("bindings.rs"))
            .expect("Couldn't write bindings!");

        println!("cargo:rustc-link-search=native={}", lib_path.display());

        #[cfg(target_os = "windows")]
        {
            println!("cargo:rustc-link-lib=TLCCS_64");
        }
        #[cfg(not(target_os = "windows"))]
        {
            println!("cargo:rustc-link-lib=tlccs");
        }
    }
    #[cfg(not(feature = "tlccs-driver"))]
    {
        // Emit an empty bindings file so src/lib.rs compiles without the driver.
        let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
        std::fs::write(
            out_path.join("bindings.rs"),
            "// Dummy bindings when the tlccs-driver feature is not enabled\n",
        )
        .expect("Couldn't write dummy bindings!");
    }
}
