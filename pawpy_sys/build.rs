fn main() {
    println!("cargo:rerun-if-env-changed=PAWPY_LIB_DIR");

    let pawpy_lib_dir =
        std::env::var("PAWPY_LIB_DIR").unwrap_or_else(|_| "/opt/pawpy/lib".to_string());

    println!("cargo:rustc-link-search=native={}", pawpy_lib_dir);
    println!("cargo:rustc-link-lib=pawpy");
}
