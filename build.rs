use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds run the simulator and the test suite; nothing to configure.
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Configure for ATmega328P
    println!("cargo:rustc-link-arg=-mmcu=atmega328p");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");

    if env::var("CARGO_FEATURE_DEBUG").is_ok() {
        println!("cargo:warning=Diagnostics line enabled after each heartbeat");
    }

    println!("cargo:warning=Building for ATmega328P at 16MHz");
}
