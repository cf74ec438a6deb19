pub mod cleanup_orphaned_images;
