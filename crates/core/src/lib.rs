//! Film catalog storage and face annotation for the Filmotheque web app.

pub mod annotation {
    pub mod domain {
        pub mod frame_annotator;
    }
    pub mod infrastructure;
}

pub mod catalog {
    pub mod domain {
        pub mod catalog_error;
        pub mod film;
        pub mod film_repository;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod image_reader;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod annotate_faces_use_case;
    pub mod create_film_use_case;
    pub mod delete_film_use_case;
    pub mod edit_film_use_case;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod region;
}
