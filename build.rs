use std::env;
use std::path::Path;

// ffmpeg-sys-next does the actual linking; this only points Windows users at
// a likely vcpkg install when FFMPEG_DIR is missing.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!("cargo:warning=framecast: set FFMPEG_DIR to an FFmpeg install (e.g. from vcpkg)");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = Path::new(&vcpkg_root).join("installed").join(&triplet);
    if candidate.join("include").join("libavcodec").exists() {
        println!(
            "cargo:warning=framecast: found FFmpeg at {}; export FFMPEG_DIR to use it",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=framecast: no FFmpeg headers under {}; run `vcpkg install ffmpeg:{triplet}`",
            candidate.display()
        );
    }
}
