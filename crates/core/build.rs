fn main() {
    println!("cargo:rerun-if-changed=csrc/");

    // Variadic log shim for GET_LOG_INTERFACE
    cc::Build::new()
        .file("csrc/core_log.c")
        .warnings(true)
        .compile("retrorunner_core_log");
}
