// build.rs

fn main() -> anyhow::Result<()> {
    let _ = build_data::set_SOURCE_TIMESTAMP();
    let _ = build_data::set_RUSTC_VERSION();

    // only the ESP-IDF build carries the sysenv exported by esp-idf-sys
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
    Ok(())
}

// EOF
