use cucumber::World;
use cucumber_tests::features::steps::generation_steps::GenerationWorld;

#[tokio::main]
async fn main() {
    GenerationWorld::cucumber()
        .run_and_exit("src/features/core/generation.feature")
        .await;
}
