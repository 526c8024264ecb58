fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds (tests, simulation) skip the ESP-IDF sysenv export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
