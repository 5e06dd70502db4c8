pub mod cache {

    pub const MAX_ENTRIES: usize = 1000;

    pub const DEFAULT_TTL_SECONDS: u64 = 300;
}

pub mod limits {

    pub const MAX_SEARCH_RESULTS: usize = 50;

    pub const DEFAULT_PAGE_SIZE: u64 = 20;
}

pub mod provider {

    pub const DEFAULT_COUNTRY: &str = "IN";

    pub const DEFAULT_QUERY: &str = "software developer";

    pub const DEFAULT_DISTANCE_KM: u32 = 50;

    pub const RESULTS_PER_PAGE: u32 = 20;
}
