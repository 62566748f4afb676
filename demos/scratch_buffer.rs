use linear_arena::{AllocError, Arena};

fn main() -> Result<(), AllocError> {
    let mut scratch = Arena::new(1024);

    scratch.scoped(|arena| -> Result<(), AllocError> {
        let buffer = arena.make_str("temporary parsing data")?;
        println!("{buffer}");
        Ok(())
    })?;

    println!("Scratch reset automatically ({} bytes used)", scratch.used());
    Ok(())
}
