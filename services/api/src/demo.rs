use crate::infra::{seed_listings, InMemoryListingRepository, InMemoryObjectStore};
use clap::Args;
use homehunt::config::AppConfig;
use homehunt::error::AppError;
use homehunt::listings::{FilterField, Listing, ListingViewModel, UserId};
use homehunt::submission::{
    AssetPayload, AuthContext, OwnerInfo, PropertyField, SubmissionWorkflow, SubmitOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Case-insensitive location fragment to search for
    #[arg(long, default_value = "")]
    pub(crate) location: String,
    /// Exact category label ("Seat in a Flat", "Full Flat Rent", "Sublet")
    #[arg(long, default_value = "")]
    pub(crate) category: String,
    /// Exact gender preference ("Male", "Female", "Other")
    #[arg(long, default_value = "")]
    pub(crate) gender: String,
    /// Image file attached to the demo submission
    #[arg(long)]
    pub(crate) image: Option<PathBuf>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        location,
        category,
        gender,
        image,
    } = args;

    let config = AppConfig::load()?;
    let repository = Arc::new(InMemoryListingRepository::with_listings(seed_listings()));
    let uploader = Arc::new(InMemoryObjectStore::new(config.storage.public_bucket()));

    println!("HomeHunt demo");
    let mut view = ListingViewModel::new(Arc::clone(&repository));
    view.load().await?;
    view.set_criterion(FilterField::Location, &location);
    view.set_criterion(FilterField::Category, &category);
    view.set_criterion(FilterField::GenderPreference, &gender);

    println!(
        "\nBrowse (location: {}, category: {}, gender: {})",
        display_or_any(&location),
        display_or_any(&category),
        display_or_any(&gender)
    );
    render_listings(view.filtered());
    println!(
        "  {} of {} listings match",
        view.filtered().len(),
        view.dataset().len()
    );

    let image = image.as_deref().map(load_image).transpose()?;

    println!("\nSubmission");
    let workflow = SubmissionWorkflow::new(Arc::clone(&repository), Arc::clone(&uploader));
    workflow.set_owner(OwnerInfo {
        name: "Demo Owner".to_string(),
        email: "owner@homehunt.test".to_string(),
        phone: "01711000099".to_string(),
    })?;
    workflow.advance()?;
    for (field, value) in [
        (PropertyField::Title, "Bright sublet near Mirpur DOHS"),
        (
            PropertyField::Description,
            "Corner room with balcony, gas and wifi included",
        ),
        (PropertyField::Category, "Sublet"),
        (PropertyField::Location, "Mirpur DOHS"),
        (PropertyField::Price, "12500"),
        (PropertyField::GenderPreference, "Female"),
    ] {
        workflow.set_property_field(field, value)?;
    }
    if let Some(payload) = image {
        println!(
            "  attaching {} ({}, {} bytes)",
            payload.file_name,
            payload.content_type,
            payload.len()
        );
        workflow.attach_image(payload)?;
    }

    let auth = AuthContext::Authenticated(UserId("demo-user".to_string()));
    match workflow.submit(&auth).await {
        Ok(SubmitOutcome::Committed(listing)) => {
            println!("  committed listing #{}", listing.id);
            if let Some(image_ref) = &listing.image_ref {
                println!("  image: {image_ref}");
            }
        }
        Ok(SubmitOutcome::Ignored) => println!("  a submission is already in flight"),
        Err(err) => {
            println!("  submission ended in stage {}: {err}", workflow.stage());
            return Err(err.into());
        }
    }

    view.load().await?;
    println!(
        "\nCatalogue now holds {} listings ({} stored images); {} match the current filters",
        view.dataset().len(),
        uploader.len(),
        view.filtered().len()
    );

    Ok(())
}

fn display_or_any(value: &str) -> &str {
    if value.is_empty() {
        "any"
    } else {
        value
    }
}

fn render_listings(listings: &[Listing]) {
    if listings.is_empty() {
        println!("  (no listings)");
        return;
    }
    for listing in listings {
        let category = listing
            .category
            .map(|category| category.label())
            .unwrap_or("-");
        let gender = listing
            .gender_preference
            .map(|gender| gender.label())
            .unwrap_or("-");
        println!(
            "  #{} {} | {} | {} | {} | {}",
            listing.id,
            listing.title,
            listing.location,
            category,
            listing.price_label(),
            gender
        );
    }
}

fn load_image(path: &Path) -> Result<AssetPayload, AppError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();
    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    Ok(AssetPayload::new(file_name, content_type, bytes))
}
