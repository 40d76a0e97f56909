mod image_hash;
mod presigned_validation;
