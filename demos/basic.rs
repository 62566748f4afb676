use linear_arena::{AllocError, Arena, DEFAULT_ALIGN};

fn main() -> Result<(), AllocError> {
    let mut arena = Arena::new(1024);

    let _header = arena.allocate(32, DEFAULT_ALIGN)?;
    let _body = arena.allocate(64, DEFAULT_ALIGN)?;
    println!("Used: {} bytes", arena.used());

    arena.reset();
    println!("After reset: {} bytes", arena.used());
    Ok(())
}
