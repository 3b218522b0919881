fn main() {
    // The ESP-IDF build environment only applies when cross-compiling for
    // Xtensa; host builds must not touch it.
    if let Ok(target) = std::env::var("TARGET") {
        if target.contains("xtensa") {
            embuild::espidf::sysenv::output();
        }
    }
}
