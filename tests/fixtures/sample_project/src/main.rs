mod utils;

fn main() {
    println!("{}", utils::helper::greeting("sample"));
}
