mod report_materializer;

pub use report_materializer::ReportMaterializer;
