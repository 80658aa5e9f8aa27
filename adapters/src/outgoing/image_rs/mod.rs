pub mod webp_avatar_image;
