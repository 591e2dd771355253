fn main() {
    if let Err(e) = shadow_rs::ShadowBuilder::builder().build() {
        panic!("Failed to generate build metadata: {e}");
    }
}
