use linear_arena::{AllocError, Arena};

struct User {
    id: u32,
    name: &'static str,
}

fn main() -> Result<(), AllocError> {
    let arena = Arena::new(8192);

    let user = arena.make(User { id: 1, name: "Alice" })?;
    println!("{} {}", user.id, user.name);

    let numbers = arena.make_array::<i32>(5)?;
    for (slot, value) in numbers.iter_mut().zip((0..).step_by(10)) {
        *slot = value;
    }
    let line: Vec<String> = numbers.iter().map(ToString::to_string).collect();
    println!("{}", line.join(" "));

    println!("Used: {}", arena.used());
    Ok(())
}
