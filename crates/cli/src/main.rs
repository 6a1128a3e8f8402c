mod application;

use std::io;

#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(err) = application::run().await {
        eprintln!("[specify] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}
