/// XML naming of one FIAS table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableSchema {
    identifier: &'static str,
    container: &'static str,
    item: &'static str,
}

impl TableSchema {
    pub const fn new(identifier: &'static str, container: &'static str, item: &'static str) -> Self {
        Self {
            identifier,
            container,
            item,
        }
    }

    /// Short upper-case table code, e.g. `HOUSE`.
    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    /// Root element wrapping every item of the table.
    pub fn container(&self) -> &'static str {
        self.container
    }

    /// Element written for each record.
    pub fn item(&self) -> &'static str {
        self.item
    }

    /// Name of the XML file the table is converted to.
    pub fn output_file_name(&self) -> String {
        format!("AS_{}.XML", self.identifier)
    }
}

static TABLES: [TableSchema; 16] = [
    TableSchema::new("ACTSTAT", "ActualStatuses", "ActualStatus"),
    TableSchema::new("ADDROBJ", "AddressObjects", "Object"),
    TableSchema::new("CENTERST", "CenterStatuses", "CenterStatus"),
    TableSchema::new("CURENTST", "CurrentStatuses", "CurrentStatus"),
    TableSchema::new("ESTSTAT", "EstateStatuses", "EstateStatus"),
    TableSchema::new("FLATTYPE", "FlatTypes", "FlatType"),
    TableSchema::new("HOUSEINT", "HouseIntervals", "HouseInterval"),
    TableSchema::new("HOUSE", "Houses", "House"),
    TableSchema::new("HSTSTAT", "HouseStateStatuses", "HouseStateStatus"),
    TableSchema::new("INTVSTAT", "IntervalStatuses", "IntervalStatus"),
    TableSchema::new("LANDMARK", "Landmarks", "Landmark"),
    TableSchema::new("NDOCTYPE", "NormativeDocumentTypes", "NormativeDocumentType"),
    TableSchema::new("NORMDOC", "NormativeDocumentes", "NormativeDocument"),
    TableSchema::new("OPERSTAT", "OperationStatuses", "OperationStatus"),
    TableSchema::new("SOCRBASE", "AddressObjectTypes", "AddressObjectType"),
    TableSchema::new("STRSTAT", "StructureStatuses", "StructureStatus"),
];

/// Every known table.
pub fn all() -> &'static [TableSchema] {
    &TABLES
}

/// Finds a table by identifier, ignoring case.
pub fn lookup(identifier: &str) -> Option<&'static TableSchema> {
    TABLES
        .iter()
        .find(|table| table.identifier.eq_ignore_ascii_case(identifier))
}
