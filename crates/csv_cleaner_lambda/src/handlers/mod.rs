pub mod object_created;
