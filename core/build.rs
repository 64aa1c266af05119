fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the kubelet runtime API for both server and client use
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/api.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/api.proto");
    Ok(())
}
