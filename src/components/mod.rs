pub mod avatar_preview;
