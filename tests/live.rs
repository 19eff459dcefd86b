//! The suite against the real PetFriends service.
//!
//! Needs network access and a registered account, so every test is ignored
//! by default. Provide credentials through `PETCHECK_EMAIL` and
//! `PETCHECK_PASSWORD` (or a settings file via `PETCHECK_CONFIG`) and run:
//!
//! ```text
//! cargo test --test live -- --ignored --test-threads=1
//! ```

use std::path::PathBuf;

use petcheck::Settings;
use petcheck::testing::{Context, RunReport, Scenario, run_scenario};

async fn check(scenario: Scenario) {
    let config = std::env::var_os("PETCHECK_CONFIG").map(PathBuf::from);
    let environment = std::env::var("PETCHECK_ENV").ok();
    let settings = Settings::load(config.as_deref(), environment.as_deref()).unwrap();
    let ctx = Context::new(settings).unwrap();

    let outcome = run_scenario(&ctx, scenario).await;

    if !outcome.passed {
        let mut report = RunReport::new(0, ctx.settings.environment.clone(), ctx.client.base_url().as_str());
        report.push(outcome);
        panic!("{}", report.render_text());
    }
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn get_api_key_for_valid_user() {
    check(Scenario::GetApiKeyForValidUser).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn get_all_pets_with_valid_key() {
    check(Scenario::GetAllPetsWithValidKey).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn add_new_pet_with_valid_data() {
    check(Scenario::AddNewPetWithValidData).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn successful_delete_self_pet() {
    check(Scenario::SuccessfulDeleteSelfPet).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn successful_update_self_pet_info() {
    check(Scenario::SuccessfulUpdateSelfPetInfo).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn add_pet_without_photo() {
    check(Scenario::AddPetWithoutPhoto).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn add_pet_jpeg_photo() {
    check(Scenario::AddPetJpegPhoto).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn add_pet_png_photo() {
    check(Scenario::AddPetPngPhoto).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn get_api_key_for_invalid_email() {
    check(Scenario::GetApiKeyForInvalidEmail).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn get_api_key_for_invalid_password() {
    check(Scenario::GetApiKeyForInvalidPassword).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn get_all_pets_with_invalid_key() {
    check(Scenario::GetAllPetsWithInvalidKey).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn add_pet_without_photo_and_invalid_age() {
    check(Scenario::AddPetWithoutPhotoAndInvalidAge).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn add_pet_gif_photo() {
    check(Scenario::AddPetGifPhoto).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn add_pet_with_empty_data() {
    check(Scenario::AddPetWithEmptyData).await;
}

#[tokio::test]
#[ignore = "hits the live PetFriends service"]
async fn delete_someones_pet() {
    check(Scenario::DeleteSomeonesPet).await;
}
