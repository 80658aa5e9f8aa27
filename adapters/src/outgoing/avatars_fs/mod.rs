pub mod avatar_pipeline_fs;
