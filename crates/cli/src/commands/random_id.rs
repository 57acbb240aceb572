use localnet_core::random_id;

pub fn handle_random_id() {
    println!("{}", random_id());
}
