// Static check over every source file: no tracing macro may mention a
// plaintext field, the passphrase, or a whole plaintext input struct.
// Only opaque identifiers (patient id, record kind, row counts) are loggable.
