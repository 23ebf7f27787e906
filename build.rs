fn main() {
    // cfg.toml の変更で toml_cfg の定数を再生成する
    println!("cargo:rerun-if-changed=cfg.toml");

    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
