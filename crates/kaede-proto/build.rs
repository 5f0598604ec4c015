//! Build script: compile the scheduler service definition with tonic.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/kaede.proto");
    tonic_prost_build::configure().compile_protos(&["proto/kaede.proto"], &["proto"])?;
    Ok(())
}
