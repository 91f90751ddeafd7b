/// This module provides a DBF item reader and the field code page conversion.
pub mod dbf;

/// This module provides the XML item processor and the multi-document XML writer.
pub mod xml;
