use std::fmt::{self, Display};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::PetFriends;
use crate::auth::{AuthKey, Credentials};
use crate::environment::Settings;
use crate::http::{ApiResponse, ClientError};
use crate::pets::{PetFilter, PetForm, PetList};

use super::assertion::{Assertion, AssertionOperator::*, Checks};

/// Ways a scenario can stop before its assertions are settled.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Precondition(String),

    #[error("{0}")]
    Unexpected(String),

    #[error("login with the configured credentials failed with status {status}")]
    Login { status: u16 },

    #[error("unexpected response body (status {status}): {reason}")]
    Body { status: u16, reason: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Shared state for a run: the client handle and resolved settings.
pub struct Context {
    pub client: PetFriends,
    pub settings: Settings,
}

impl Context {
    pub fn new(settings: Settings) -> Result<Self, ClientError> {
        let client = PetFriends::with_timeout(&settings.base_url, settings.timeout)?;
        Ok(Self { client, settings })
    }

    pub fn image(&self, file_name: &str) -> PathBuf {
        self.settings.image(file_name)
    }

    /// Fresh auth key for the configured account.
    pub async fn login(&self) -> Result<AuthKey, ScenarioError> {
        let response = self.client.get_api_key(&self.settings.credentials).await?;
        match AuthKey::from_response(&response) {
            Some(key) if response.status == 200 => Ok(key),
            _ => Err(ScenarioError::Login {
                status: response.status,
            }),
        }
    }

    pub async fn pets(&self, key: &AuthKey, filter: PetFilter) -> Result<PetList, ScenarioError> {
        let response = self.client.get_list_of_pets(Some(key), filter).await?;
        parse_pet_list(&response)
    }
}

fn parse_pet_list(response: &ApiResponse) -> Result<PetList, ScenarioError> {
    response.parse::<PetList>().map_err(|err| ScenarioError::Body {
        status: response.status,
        reason: err.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Positive,
    Negative,
}

impl Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScenarioKind::Positive => "positive",
            ScenarioKind::Negative => "negative",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    GetApiKeyForValidUser,
    GetAllPetsWithValidKey,
    AddNewPetWithValidData,
    SuccessfulDeleteSelfPet,
    SuccessfulUpdateSelfPetInfo,
    AddPetWithoutPhoto,
    AddPetJpegPhoto,
    AddPetPngPhoto,
    GetApiKeyForInvalidEmail,
    GetApiKeyForInvalidPassword,
    GetAllPetsWithInvalidKey,
    AddPetWithoutPhotoAndInvalidAge,
    AddPetGifPhoto,
    AddPetWithEmptyData,
    DeleteSomeonesPet,
}

impl Scenario {
    pub const ALL: [Scenario; 15] = [
        Scenario::GetApiKeyForValidUser,
        Scenario::GetAllPetsWithValidKey,
        Scenario::AddNewPetWithValidData,
        Scenario::SuccessfulDeleteSelfPet,
        Scenario::SuccessfulUpdateSelfPetInfo,
        Scenario::AddPetWithoutPhoto,
        Scenario::AddPetJpegPhoto,
        Scenario::AddPetPngPhoto,
        Scenario::GetApiKeyForInvalidEmail,
        Scenario::GetApiKeyForInvalidPassword,
        Scenario::GetAllPetsWithInvalidKey,
        Scenario::AddPetWithoutPhotoAndInvalidAge,
        Scenario::AddPetGifPhoto,
        Scenario::AddPetWithEmptyData,
        Scenario::DeleteSomeonesPet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::GetApiKeyForValidUser => "get_api_key_for_valid_user",
            Scenario::GetAllPetsWithValidKey => "get_all_pets_with_valid_key",
            Scenario::AddNewPetWithValidData => "add_new_pet_with_valid_data",
            Scenario::SuccessfulDeleteSelfPet => "successful_delete_self_pet",
            Scenario::SuccessfulUpdateSelfPetInfo => "successful_update_self_pet_info",
            Scenario::AddPetWithoutPhoto => "add_pet_without_photo",
            Scenario::AddPetJpegPhoto => "add_pet_jpeg_photo",
            Scenario::AddPetPngPhoto => "add_pet_png_photo",
            Scenario::GetApiKeyForInvalidEmail => "get_api_key_for_invalid_email",
            Scenario::GetApiKeyForInvalidPassword => "get_api_key_for_invalid_password",
            Scenario::GetAllPetsWithInvalidKey => "get_all_pets_with_invalid_key",
            Scenario::AddPetWithoutPhotoAndInvalidAge => "add_pet_without_photo_and_invalid_age",
            Scenario::AddPetGifPhoto => "add_pet_gif_photo",
            Scenario::AddPetWithEmptyData => "add_pet_with_empty_data",
            Scenario::DeleteSomeonesPet => "delete_someones_pet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix("test_").unwrap_or(name);
        Self::ALL.into_iter().find(|scenario| scenario.name() == name)
    }

    pub fn kind(self) -> ScenarioKind {
        match self {
            Scenario::GetApiKeyForValidUser
            | Scenario::GetAllPetsWithValidKey
            | Scenario::AddNewPetWithValidData
            | Scenario::SuccessfulDeleteSelfPet
            | Scenario::SuccessfulUpdateSelfPetInfo
            | Scenario::AddPetWithoutPhoto
            | Scenario::AddPetJpegPhoto
            | Scenario::AddPetPngPhoto => ScenarioKind::Positive,
            _ => ScenarioKind::Negative,
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Scenario::GetApiKeyForValidUser => "valid credentials return status 200 and a key",
            Scenario::GetAllPetsWithValidKey => "the full pet list is not empty",
            Scenario::AddNewPetWithValidData => "a pet with a photo can be added",
            Scenario::SuccessfulDeleteSelfPet => "an own pet can be deleted and disappears from the list",
            Scenario::SuccessfulUpdateSelfPetInfo => "an own pet's name, type and age can be updated",
            Scenario::AddPetWithoutPhoto => "a pet can be added without a photo",
            Scenario::AddPetJpegPhoto => "a jpeg photo can be attached to an own pet",
            Scenario::AddPetPngPhoto => "a png photo can be attached to an own pet",
            Scenario::GetApiKeyForInvalidEmail => "an unknown email is refused with 403",
            Scenario::GetApiKeyForInvalidPassword => "a wrong password is refused with 403",
            Scenario::GetAllPetsWithInvalidKey => "an invalid auth key cannot list own pets",
            Scenario::AddPetWithoutPhotoAndInvalidAge => "a negative age is rejected with 500",
            Scenario::AddPetGifPhoto => "a gif photo is rejected with 500",
            Scenario::AddPetWithEmptyData => "a pet with blank fields is not created",
            Scenario::DeleteSomeonesPet => "deleting the first pet of the full list",
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<Checks, ScenarioError> {
        match self {
            Scenario::GetApiKeyForValidUser => get_api_key_for_valid_user(ctx).await,
            Scenario::GetAllPetsWithValidKey => get_all_pets_with_valid_key(ctx).await,
            Scenario::AddNewPetWithValidData => add_new_pet_with_valid_data(ctx).await,
            Scenario::SuccessfulDeleteSelfPet => successful_delete_self_pet(ctx).await,
            Scenario::SuccessfulUpdateSelfPetInfo => successful_update_self_pet_info(ctx).await,
            Scenario::AddPetWithoutPhoto => add_pet_without_photo(ctx).await,
            Scenario::AddPetJpegPhoto => add_own_pet_photo(ctx, "sloth1.jpeg", true).await,
            Scenario::AddPetPngPhoto => add_own_pet_photo(ctx, "blob.png", true).await,
            Scenario::GetApiKeyForInvalidEmail => {
                let credentials = Credentials::new(
                    ctx.settings.invalid_email.as_str(),
                    ctx.settings.credentials.password.as_str(),
                );
                get_api_key_refused(ctx, &credentials).await
            }
            Scenario::GetApiKeyForInvalidPassword => {
                let credentials = Credentials::new(
                    ctx.settings.credentials.email.as_str(),
                    ctx.settings.invalid_password.as_str(),
                );
                get_api_key_refused(ctx, &credentials).await
            }
            Scenario::GetAllPetsWithInvalidKey => get_all_pets_with_invalid_key(ctx).await,
            Scenario::AddPetWithoutPhotoAndInvalidAge => add_pet_with_invalid_age(ctx).await,
            Scenario::AddPetGifPhoto => add_own_pet_photo(ctx, "kitten.gif", false).await,
            Scenario::AddPetWithEmptyData => add_pet_with_empty_data(ctx).await,
            Scenario::DeleteSomeonesPet => delete_someones_pet(ctx).await,
        }
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

async fn get_api_key_for_valid_user(ctx: &Context) -> Result<Checks, ScenarioError> {
    let response = ctx.client.get_api_key(&ctx.settings.credentials).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 200));
    checks.expect(&response, Assertion::json_path("key", Exists, ""));
    Ok(checks)
}

async fn get_all_pets_with_valid_key(ctx: &Context) -> Result<Checks, ScenarioError> {
    let key = ctx.login().await?;
    let response = ctx.client.get_list_of_pets(Some(&key), PetFilter::All).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 200));
    checks.expect(&response, Assertion::json_length("pets", GreaterThan, 0));
    Ok(checks)
}

async fn add_new_pet_with_valid_data(ctx: &Context) -> Result<Checks, ScenarioError> {
    let pet = PetForm::new("Extra", "kitty", 20);
    let key = ctx.login().await?;
    let response = ctx
        .client
        .add_new_pet(Some(&key), &pet, &ctx.image("cat1.jpg"))
        .await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 200));
    checks.expect(&response, Assertion::json_path("name", Equals, pet.name.as_str()));
    Ok(checks)
}

async fn successful_delete_self_pet(ctx: &Context) -> Result<Checks, ScenarioError> {
    let key = ctx.login().await?;
    let mut my_pets = ctx.pets(&key, PetFilter::MyPets).await?;

    if my_pets.is_empty() {
        let pet = PetForm::new("Суперкот", "кот", 3);
        ctx.client
            .add_new_pet(Some(&key), &pet, &ctx.image("cat1.jpg"))
            .await?;
        my_pets = ctx.pets(&key, PetFilter::MyPets).await?;
    }

    let pet_id = my_pets
        .first()
        .map(|pet| pet.id.clone())
        .ok_or_else(|| ScenarioError::Precondition("There is no my pets".to_string()))?;
    let response = ctx.client.delete_pet(Some(&key), &pet_id).await?;
    let my_pets = ctx.pets(&key, PetFilter::MyPets).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 200));
    expect_removed(&mut checks, &my_pets, &pet_id);
    Ok(checks)
}

async fn successful_update_self_pet_info(ctx: &Context) -> Result<Checks, ScenarioError> {
    let pet = PetForm::new("Мурзик", "Котэ", 5);
    let key = ctx.login().await?;
    let pet_id = first_own_pet_id(ctx, &key).await?;
    let response = ctx.client.update_pet_info(Some(&key), &pet_id, &pet).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 200));
    checks.expect(&response, Assertion::json_path("name", Equals, pet.name.as_str()));
    Ok(checks)
}

async fn add_pet_without_photo(ctx: &Context) -> Result<Checks, ScenarioError> {
    let pet = PetForm::new("Гена", "sloth", 10);
    let key = ctx.login().await?;
    let response = ctx.client.add_pet_without_photo(Some(&key), &pet).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 200));
    checks.expect(&response, Assertion::json_path("name", Equals, pet.name.as_str()));
    Ok(checks)
}

/// Attach a photo to the first own pet. Supported formats must be stored,
/// unsupported ones must fail with 500.
async fn add_own_pet_photo(ctx: &Context, file_name: &str, supported: bool) -> Result<Checks, ScenarioError> {
    let key = ctx.login().await?;
    let pet_id = first_own_pet_id(ctx, &key).await?;
    let response = ctx
        .client
        .add_pet_photo(Some(&key), &pet_id, &ctx.image(file_name))
        .await?;

    let mut checks = Checks::new();
    if supported {
        checks.expect(&response, Assertion::status(Equals, 200));
        checks.expect(&response, Assertion::json_path("pet_photo", NotEquals, ""));
    } else {
        checks.expect(&response, Assertion::status(Equals, 500));
    }
    Ok(checks)
}

async fn get_api_key_refused(ctx: &Context, credentials: &Credentials) -> Result<Checks, ScenarioError> {
    let response = ctx.client.get_api_key(credentials).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 403));
    Ok(checks)
}

async fn get_all_pets_with_invalid_key(ctx: &Context) -> Result<Checks, ScenarioError> {
    // Log in first so only the key differs from a valid call.
    ctx.login().await?;
    let key = AuthKey::new("invalid_key");
    let response = ctx.client.get_list_of_pets(Some(&key), PetFilter::MyPets).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(NotEquals, 200));
    checks.expect(&response, Assertion::body(NotContains, "my_pets"));
    Ok(checks)
}

async fn add_pet_with_invalid_age(ctx: &Context) -> Result<Checks, ScenarioError> {
    let pet = PetForm::new("Гена", "sloth", -1);
    let key = ctx.login().await?;
    let response = ctx.client.add_pet_without_photo(Some(&key), &pet).await?;

    if response.status == 200 {
        return Err(ScenarioError::Unexpected("Age accepts negative value".to_string()));
    }

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 500));
    Ok(checks)
}

async fn add_pet_with_empty_data(ctx: &Context) -> Result<Checks, ScenarioError> {
    let pet = PetForm::new("", "", "");
    let key = ctx.login().await?;
    let response = ctx
        .client
        .add_new_pet(Some(&key), &pet, &ctx.image("tiger.jpeg"))
        .await?;

    if response.status == 200 {
        return Err(ScenarioError::Unexpected("Blank pet added".to_string()));
    }

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(NotEquals, 200));
    Ok(checks)
}

async fn delete_someones_pet(ctx: &Context) -> Result<Checks, ScenarioError> {
    let key = ctx.login().await?;
    let all_pets = ctx.pets(&key, PetFilter::All).await?;
    let pet_id = all_pets
        .first()
        .map(|pet| pet.id.clone())
        .ok_or_else(|| ScenarioError::Precondition("There is no pets".to_string()))?;

    let response = ctx.client.delete_pet(Some(&key), &pet_id).await?;
    let all_pets = ctx.pets(&key, PetFilter::All).await?;

    let mut checks = Checks::new();
    checks.expect(&response, Assertion::status(Equals, 200));
    expect_removed(&mut checks, &all_pets, &pet_id);
    Ok(checks)
}

async fn first_own_pet_id(ctx: &Context, key: &AuthKey) -> Result<String, ScenarioError> {
    ctx.pets(key, PetFilter::MyPets)
        .await?
        .first()
        .map(|pet| pet.id.clone())
        .ok_or_else(|| ScenarioError::Precondition("There is no my pets".to_string()))
}

fn expect_removed(checks: &mut Checks, listing: &PetList, pet_id: &str) {
    let still_listed = listing.contains_id(pet_id);
    checks.ensure(
        format!("pet `{pet_id}` absent from listing"),
        !still_listed,
        if still_listed { "still listed" } else { "absent" },
    );
}
