use linear_arena::{AllocError, Arena};

struct Temp {
    x: i32,
}

fn main() -> Result<(), AllocError> {
    let mut arena = Arena::new(4096);
    println!("Before: {}", arena.used());

    {
        let scope = arena.scope();
        let t1 = scope.make(Temp { x: 10 })?;
        let t2 = scope.make(Temp { x: 20 })?;

        println!("Inside scope: {}", scope.used());
        println!("{}, {}", t1.x, t2.x);
    }

    println!("After scope: {}", arena.used());
    Ok(())
}
