//! Demo data for a fresh installation.
//!
//! `showcase demo` downloads the glTF sample models and their screenshots
//! into the upload directories, clears the database and inserts a `demo`
//! superuser (password `demo`), four categories and one work per model.
//! Nothing is written to the database until every download succeeded.

use anyhow::{Context, Result};
use futures::{StreamExt, stream};

use crate::db::{Database, WorkFields, WorkRepository};

use super::auth::AuthService;
use super::storage::{FileKind, UploadStorage};

/// Where the sample models are published
pub const SAMPLE_MODELS_URL: &str =
    "https://raw.githubusercontent.com/KhronosGroup/glTF-Sample-Models/master/2.0";

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";

pub const DEMO_CATEGORIES: [&str; 4] = ["Showcase", "Standard", "Feature Tests", "Minimal Tests"];

const DOWNLOAD_CONCURRENCY: usize = 4;

/// One sample model. Paths are relative to the asset base URL.
#[derive(Debug, Clone, Copy)]
pub struct DemoWork {
    pub title: &'static str,
    /// Index into [`DEMO_CATEGORIES`]
    pub category: usize,
    pub model_path: &'static str,
    pub cover_path: &'static str,
}

const fn work(
    title: &'static str,
    category: usize,
    model_path: &'static str,
    cover_path: &'static str,
) -> DemoWork {
    DemoWork {
        title,
        category,
        model_path,
        cover_path,
    }
}

pub static DEMO_WORKS: [DemoWork; 21] = [
    work("Avocado", 0, "Avocado/glTF-Binary/Avocado.glb", "Avocado/screenshot/screenshot.jpg"),
    work(
        "Barramundi Fish",
        0,
        "BarramundiFish/glTF-Binary/BarramundiFish.glb",
        "BarramundiFish/screenshot/screenshot.jpg",
    ),
    work("Boom Box", 0, "BoomBox/glTF-Binary/BoomBox.glb", "BoomBox/screenshot/screenshot.jpg"),
    work("Corset", 0, "Corset/glTF-Binary/Corset.glb", "Corset/screenshot/screenshot.jpg"),
    work(
        "Damaged Helmet",
        0,
        "DamagedHelmet/glTF-Binary/DamagedHelmet.glb",
        "DamagedHelmet/screenshot/screenshot.png",
    ),
    work("Lantern", 0, "Lantern/glTF-Binary/Lantern.glb", "Lantern/screenshot/screenshot.jpg"),
    work(
        "Water Bottle",
        0,
        "WaterBottle/glTF-Binary/WaterBottle.glb",
        "WaterBottle/screenshot/screenshot.jpg",
    ),
    work("Box", 1, "Box/glTF-Binary/Box.glb", "Box/screenshot/screenshot.png"),
    work(
        "Box Textured",
        1,
        "BoxTextured/glTF-Binary/BoxTextured.glb",
        "BoxTextured/screenshot/screenshot.png",
    ),
    work(
        "Box Vertex Colors",
        1,
        "BoxVertexColors/glTF-Binary/BoxVertexColors.glb",
        "BoxVertexColors/screenshot/screenshot.png",
    ),
    work(
        "2 Cylinder Engine",
        1,
        "2CylinderEngine/glTF-Binary/2CylinderEngine.glb",
        "2CylinderEngine/screenshot/screenshot.png",
    ),
    work(
        "Reciprocating Saw",
        1,
        "ReciprocatingSaw/glTF-Binary/ReciprocatingSaw.glb",
        "ReciprocatingSaw/screenshot/screenshot.png",
    ),
    work(
        "Gearbox Assy",
        1,
        "GearboxAssy/glTF-Binary/GearboxAssy.glb",
        "GearboxAssy/screenshot/screenshot.png",
    ),
    work("Buggy", 1, "Buggy/glTF-Binary/Buggy.glb", "Buggy/screenshot/screenshot.png"),
    work(
        "Cesium Milk Truck",
        1,
        "CesiumMilkTruck/glTF-Binary/CesiumMilkTruck.glb",
        "CesiumMilkTruck/screenshot/screenshot.gif",
    ),
    work("Fox", 1, "Fox/glTF-Binary/Fox.glb", "Fox/screenshot/screenshot.jpg"),
    work(
        "Metal Rough Spheres (Textureless)",
        2,
        "MetalRoughSpheresNoTextures/glTF-Binary/MetalRoughSpheresNoTextures.glb",
        "MetalRoughSpheresNoTextures/screenshot/screenshot.png",
    ),
    work(
        "Orientation Test",
        2,
        "OrientationTest/glTF-Binary/OrientationTest.glb",
        "OrientationTest/screenshot/screenshot.png",
    ),
    work(
        "Recursive Skeletons",
        2,
        "RecursiveSkeletons/glTF-Binary/RecursiveSkeletons.glb",
        "RecursiveSkeletons/screenshot/screenshot.jpg",
    ),
    work(
        "Unicode Test",
        3,
        "Unicode%E2%9D%A4%E2%99%BBTest/glTF-Binary/Unicode%E2%9D%A4%E2%99%BBTest.glb",
        "Unicode%E2%9D%A4%E2%99%BBTest/screenshot/screenshot.png",
    ),
    work(
        "SpecGloss Vs MetalRough",
        2,
        "SpecGlossVsMetalRough/glTF-Binary/SpecGlossVsMetalRough.glb",
        "SpecGlossVsMetalRough/screenshot/screenshot-large.jpg",
    ),
];

/// Stored file names of one downloaded work
struct Downloaded {
    model: String,
    cover: String,
}

pub struct DemoSeeder {
    db: Database,
    auth: AuthService,
    storage: UploadStorage,
    http_client: reqwest::Client,
    base_url: String,
}

impl DemoSeeder {
    pub fn new(
        db: Database,
        auth: AuthService,
        storage: UploadStorage,
        http_client: reqwest::Client,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            auth,
            storage,
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Download every sample, then replace the database contents with the demo data.
    pub async fn run(&self) -> Result<()> {
        self.storage.ensure_dirs().await?;

        tracing::info!(works = DEMO_WORKS.len(), base_url = %self.base_url, "Downloading demo files");
        let downloaded = self.download_all().await?;
        tracing::info!("All demo files downloaded");

        if let Err(e) = self.insert(&downloaded).await {
            self.discard(&downloaded).await;
            return Err(e);
        }

        tracing::info!(
            username = DEMO_USERNAME,
            categories = DEMO_CATEGORIES.len(),
            works = downloaded.len(),
            "Demo data created"
        );
        Ok(())
    }

    async fn download_all(&self) -> Result<Vec<Downloaded>> {
        let results: Vec<Result<Downloaded>> = stream::iter(DEMO_WORKS.iter())
            .map(|work| self.download_work(work))
            .buffered(DOWNLOAD_CONCURRENCY)
            .collect()
            .await;

        let mut downloaded = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(files) => downloaded.push(files),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => {
                self.discard(&downloaded).await;
                Err(e)
            }
            None => Ok(downloaded),
        }
    }

    async fn download_work(&self, work: &DemoWork) -> Result<Downloaded> {
        let model = self.download(FileKind::Model, work.model_path).await?;
        match self.download(FileKind::Cover, work.cover_path).await {
            Ok(cover) => Ok(Downloaded { model, cover }),
            Err(e) => {
                self.remove(FileKind::Model, &model).await;
                Err(e)
            }
        }
    }

    async fn download(&self, kind: FileKind, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download {}: {}", url, response.status());
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read {}", url))?;

        let mut reader: &[u8] = &bytes;
        self.storage.store(kind, &mut reader).await
    }

    async fn insert(&self, downloaded: &[Downloaded]) -> Result<()> {
        self.db.reset().await?;

        self.auth
            .register(DEMO_USERNAME, DEMO_PASSWORD, true)
            .await
            .context("Failed to create the demo user")?;

        let mut category_ids = Vec::with_capacity(DEMO_CATEGORIES.len());
        for name in DEMO_CATEGORIES {
            category_ids.push(self.db.categories().create(name).await?.id);
        }

        let mut tx = self.db.begin().await?;
        for (work, files) in DEMO_WORKS.iter().zip(downloaded) {
            let fields = WorkFields {
                title: work.title.to_string(),
                category_id: category_ids[work.category],
                model_filename: files.model.clone(),
                cover_filename: files.cover.clone(),
            };
            WorkRepository::create_in(&mut tx, &fields).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn discard(&self, downloaded: &[Downloaded]) {
        for files in downloaded {
            self.remove(FileKind::Model, &files.model).await;
            self.remove(FileKind::Cover, &files.cover).await;
        }
    }

    async fn remove(&self, kind: FileKind, filename: &str) {
        if let Err(e) = self.storage.remove(kind, filename).await {
            tracing::warn!(
                kind = kind.as_str(),
                filename = %filename,
                error = %e,
                "Failed to remove demo file"
            );
        }
    }
}
