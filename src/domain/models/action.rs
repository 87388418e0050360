use std::path::PathBuf;

use super::GenerationRequest;
use super::ImageRef;

pub enum Action {
    GenerateImage(GenerationRequest),
    SaveImage(ImageRef, PathBuf),
    UploadImage(PathBuf),
}
